use cucumber::given;
use feast_common::Coordinate;
use feast_engine::{db_types::Role, location::PermissionStatus};

use crate::cucumber::{feast_world::FeastSystem, FeastWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut FeastWorld) {
    let system = FeastSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a signed-in customer named {string}")]
async fn signed_in_customer(world: &mut FeastWorld, name: String) {
    world.sign_up(&name, &[]).await;
}

#[given(expr = "a signed-in courier named {string}")]
async fn signed_in_courier(world: &mut FeastWorld, name: String) {
    world.sign_up(&name, &[Role::Courier]).await;
}

#[given(expr = "the device is at {float}, {float}")]
async fn device_position(world: &mut FeastWorld, latitude: f64, longitude: f64) {
    let position = Coordinate::new(latitude, longitude).expect("Invalid test coordinate");
    world.system().location.set_position(position);
}

#[given("location permission is denied")]
async fn permission_denied(world: &mut FeastWorld) {
    world.system().location.set_permission(PermissionStatus::Denied);
}
