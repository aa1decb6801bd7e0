use classdb::prelude::*;

#[derive(Class, Default)]
struct Light {
    base: BaseObject,
    energy: f64,
}

impl RegisterClass for Light {
    fn bind_members(class: ClassBuilder<'_, Self>) -> Result<(), RegistrationError> {
        class
            .method(("set_energy", ["energy"]), |l: &mut Light, e: f64| l.energy = e)?
            .method("get_energy", |l: &Light| l.energy)?
            .property_float("energy", "set_energy", "get_energy")?;
        Ok(())
    }
}

fn main() -> Result<(), ClassDbError> {
    let db = ClassDb::with_core_classes()?;
    db.register_class::<Light>()?;

    let mut light = db.instantiate("Light")?;
    db.set_property(light.as_mut(), "energy", Variant::Int(2))?;
    assert_eq!(db.get_property(light.as_mut(), "energy")?, Variant::Float(2.0));
    Ok(())
}
