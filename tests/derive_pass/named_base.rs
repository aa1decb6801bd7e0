use classdb::Class;
use classdb::core::{BaseObject, Object, StaticClass};

#[derive(Class, Default)]
struct Node {
    base: BaseObject,
    name: String,
}

#[derive(Class, Default)]
struct Control {
    base: Node,
    visible: bool,
}

fn main() {
    assert_eq!(Control::CLASS_NAME, "Control");
    assert_eq!(Control::PARENT_CLASS_NAME, "Node");
    assert_eq!(Node::PARENT_CLASS_NAME, "Object");

    let mut control = Control::default();
    control.base.name = "panel".into();
    control.visible = true;

    let object: &mut dyn Object = &mut control;
    assert_eq!(object.get_class(), "Control");
    assert_eq!(object.downcast_ref::<Node>().map(|n| n.name.as_str()), Some("panel"));
    assert!(object.downcast_mut::<BaseObject>().is_some());
    assert!(object.downcast_ref::<Control>().is_some_and(|c| c.visible));
}
