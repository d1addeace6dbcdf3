//! Example demonstrating scene features

use std::sync::Arc;

use scenegraph::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let registry = Arc::new(ComponentRegistry::with_builtins()?);
    log::info!("Registered component types: {:?}", registry.type_names());

    let config = SceneConfig::default().with_name("Demo");
    let mut scene = Scene::new(config, Arc::clone(&registry));

    // Camera looking down the Z axis
    let camera = scene.create_entity("Camera")?;
    let transform = scene.add_component::<Transform>(camera)?;
    transform.set_position(Vec3::new(0.0, 2.0, -10.0));

    // Cube, rotated a quarter turn and moved along its own forward axis
    let cube = scene.create_entity("Cube")?;
    let transform = scene.add_component::<Transform>(cube)?;
    transform.set_position(Vec3::new(0.0, 0.0, 5.0));
    transform.rotate_local_y(90.0);
    transform.move_local_z(2.0);
    log::info!(
        "Cube position {} forward {}",
        transform.position(),
        transform.forward()
    );

    let mesh = scene.add_component_by_name(cube, "MeshRenderComponent")?;
    if let Some(mesh) = mesh.downcast_mut::<MeshRenderComponent>() {
        mesh.set_mesh("cube");
        mesh.set_material("bricks");
    }
    if let Some(entity) = scene.entity_mut(cube) {
        entity.add_tag("static");
    }

    // Edit a field the way an inspector UI would
    scene.write_debug_field(
        "Cube",
        "Transform",
        "Scale",
        FieldValue::Vec3(Vec3::new(2.0, 1.0, 1.0)),
    )?;
    for variable in scene.inspector().variables_for("Cube") {
        log::info!(
            "{}/{} = {:?}",
            variable.category(),
            variable.label(),
            scene.read_debug_field("Cube", variable.category(), variable.label())?
        );
    }

    scene.update(1.0 / 60.0, 1.0 / 60.0);

    // Save and reload
    let path = std::env::temp_dir().join("scenegraph_demo.json");
    scene.to_document()?.save_json(&path)?;
    log::info!("Saved scene to {}", path.display());

    let mut reloaded = Scene::new(SceneConfig::default(), registry);
    reloaded.load_document(&SceneDocument::load_json(&path)?)?;

    if let Some(id) = reloaded.find_entity("Cube") {
        if let Some(entity) = reloaded.entity(id) {
            if let Some(transform) = entity.get_component::<Transform>() {
                log::info!("Reloaded cube world matrix {}", transform.world_matrix());
            }
        }
    }

    Ok(())
}
