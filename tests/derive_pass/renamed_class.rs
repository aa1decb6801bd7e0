use classdb::Class;
use classdb::core::{BaseObject, Object, StaticClass};

#[derive(Class, Default)]
#[class(name = "Window")]
pub struct AppWindow {
    #[class(base)]
    root: BaseObject,
    title: String,
}

#[derive(Class, Default)]
#[class(name = "AcceptDialog")]
pub struct Dialog(#[class(base)] AppWindow, u32);

fn main() {
    assert_eq!(AppWindow::CLASS_NAME, "Window");
    assert_eq!(Dialog::PARENT_CLASS_NAME, "Window");

    let dialog = Dialog::default();
    assert_eq!(dialog.class_name(), "AcceptDialog");
    assert_eq!(dialog.base_object().id(), dialog.0.root.id());
    let object: &dyn Object = &dialog;
    assert!(object.is::<AppWindow>());
    assert!(object.downcast_ref::<AppWindow>().is_some_and(|w| w.title.is_empty()));
    assert_eq!(dialog.1, 0);
}
