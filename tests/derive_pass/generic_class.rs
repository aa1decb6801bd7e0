use classdb::Class;
use classdb::core::{BaseObject, Object, StaticClass};

#[derive(Class, Default)]
#[class(name = "Slot")]
struct Slot<T: Send + Sync + 'static> {
    base: BaseObject,
    value: T,
}

fn main() {
    assert_eq!(<Slot<i32> as StaticClass>::CLASS_NAME, "Slot");

    let slot = Slot { base: BaseObject::new(), value: 7_u8 };
    let object: &dyn Object = &slot;
    assert_eq!(object.downcast_ref::<Slot<u8>>().map(|s| s.value), Some(7));
    assert!(object.downcast_ref::<Slot<i32>>().is_none());
}
