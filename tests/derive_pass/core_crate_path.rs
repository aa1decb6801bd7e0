use classdb_core::{BaseObject, Object, StaticClass};
use classdb_macros::Class;

#[derive(Class, Default)]
#[class(crate = "::classdb_core")]
struct Timer {
    base: BaseObject,
    wait_time: f64,
}

fn main() {
    assert_eq!(Timer::CLASS_NAME, "Timer");
    assert_eq!(Timer::PARENT_CLASS_NAME, "Object");

    let mut timer = Timer::default();
    timer.wait_time = 0.5;
    let object: &mut dyn Object = &mut timer;
    assert_eq!(object.get_class(), "Timer");
    assert!(object.downcast_ref::<Timer>().is_some_and(|t| t.wait_time == 0.5));
}
