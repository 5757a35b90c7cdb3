use std::time::Duration;

use cucumber::{then, when};
use feast_common::{Coordinate, MenuItemRef};
use feast_engine::{badge_count, db_types::OrderStatusType, total_quantity, FeastApiError};
use tokio::time::timeout;

use crate::cucumber::FeastWorld;

const WAIT: Duration = Duration::from_secs(2);

#[when(expr = "{word} adds {int} of menu item {word} {string} to the cart")]
async fn add_to_cart(world: &mut FeastWorld, name: String, quantity: i64, id: String, menu_name: String) {
    world.cart(&name).add(MenuItemRef::new(id, menu_name), quantity).await.expect("Error adding to cart");
}

#[when(expr = "{word} sets the quantity of menu item {word} to {int}")]
async fn set_quantity(world: &mut FeastWorld, name: String, id: String, quantity: i64) {
    let item = world.cart_item(&name, &id).await;
    world.cart(&name).set_quantity(&item.id, quantity).await.expect("Error setting quantity");
}

#[when(expr = "{word} increments menu item {word}")]
async fn increment(world: &mut FeastWorld, name: String, id: String) {
    let item = world.cart_item(&name, &id).await;
    world.cart(&name).increment(&item.id).await.expect("Error incrementing");
}

#[when(expr = "{word} decrements menu item {word}")]
async fn decrement(world: &mut FeastWorld, name: String, id: String) {
    let item = world.cart_item(&name, &id).await;
    world.cart(&name).decrement(&item.id).await.expect("Error decrementing");
}

#[when(expr = "{word} removes menu item {word} from the cart")]
async fn remove(world: &mut FeastWorld, name: String, id: String) {
    let item = world.cart_item(&name, &id).await;
    let removed = world.cart(&name).remove(&item.id).await.expect("Error removing");
    assert!(removed);
    let removed_again = world.cart(&name).remove(&item.id).await.expect("Removing twice should not fail");
    assert!(!removed_again);
}

#[when(expr = "{word} places an order from the cart")]
async fn place_order(world: &mut FeastWorld, name: String) {
    let location = world.system().location.clone();
    match world.orders(&name).place_order_from_cart(&location).await {
        Ok(receipt) => {
            world.last_receipt = Some(receipt);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "{word} marks the order as {word}")]
async fn mark_order(world: &mut FeastWorld, name: String, status: String) {
    let order_id = world.last_receipt.as_ref().expect("No order has been placed").order_id.clone();
    let api = world.orders(&name);
    let result = match status.as_str() {
        "delivered" => api.mark_delivered(&order_id).await,
        "in-transit" => api.mark_in_transit(&order_id).await,
        s => panic!("Unknown status {s}"),
    };
    world.last_error = result.err();
}

#[then(expr = "the cart of {word} has {int} line item(s)")]
async fn cart_size(world: &mut FeastWorld, name: String, count: usize) {
    let cart = world.cart(&name).list().await.expect("Error fetching cart");
    assert_eq!(cart.len(), count);
    assert!(cart.iter().all(|i| i.quantity >= 1), "A line item has a quantity below 1");
}

#[then(expr = "the cart of {word} holds {int} unit(s) in total")]
async fn cart_units(world: &mut FeastWorld, name: String, count: i64) {
    let cart = world.cart(&name).list().await.expect("Error fetching cart");
    assert_eq!(total_quantity(&cart), count);
}

#[then(expr = "the cart of {word} has {int} of menu item {word}")]
async fn cart_quantity(world: &mut FeastWorld, name: String, quantity: i64, id: String) {
    let item = world.cart_item(&name, &id).await;
    assert_eq!(item.quantity, quantity);
}

#[then(expr = "{word} cannot change the quantity of menu item {word} in the cart of {word}")]
async fn cannot_touch_foreign_cart(world: &mut FeastWorld, name: String, id: String, owner: String) {
    let item = world.cart_item(&owner, &id).await;
    let result = world.cart(&name).set_quantity(&item.id, 5).await;
    assert!(matches!(result, Err(FeastApiError::NotFound(_))), "Expected NotFound, got {result:?}");
    let unchanged = world.cart_item(&owner, &id).await;
    assert_eq!(unchanged.quantity, item.quantity);
}

#[then("the order was placed")]
async fn order_was_placed(world: &mut FeastWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
    let receipt = world.last_receipt.as_ref().expect("No receipt");
    assert!(receipt.cart_cleared(), "Cart items left behind: {:?}", receipt.uncleared);
}

#[then(expr = "the order has status {word}")]
async fn order_status(world: &mut FeastWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Unknown status");
    assert_eq!(world.last_order().await.status, expected);
}

#[then(expr = "the order contains {int} of menu item {word}")]
async fn order_contains(world: &mut FeastWorld, quantity: i64, id: String) {
    let order = world.last_order().await;
    let item = order.line_items.iter().find(|i| i.menu_item.id == id).expect("Menu item is not in the order");
    assert_eq!(item.quantity, quantity);
}

#[then(expr = "the order was picked up at {float}, {float}")]
async fn order_pickup(world: &mut FeastWorld, latitude: f64, longitude: f64) {
    let order = world.last_order().await;
    assert!((order.pickup_location.latitude - latitude).abs() < 1e-9);
    assert!((order.pickup_location.longitude - longitude).abs() < 1e-9);
}

#[then(expr = "{word} has {int} order(s)")]
async fn order_count(world: &mut FeastWorld, name: String, count: usize) {
    let orders = world.orders(&name).history().await.expect("Error fetching history");
    assert_eq!(orders.len(), count);
}

#[then("no error was reported")]
async fn no_error(world: &mut FeastWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
}

#[then(expr = "the request failed with {word}")]
async fn request_failed(world: &mut FeastWorld, kind: String) {
    let err = world.last_error.as_ref().expect("Expected an error");
    let matched = match kind.as_str() {
        "PermissionDenied" => matches!(err, FeastApiError::PermissionDenied),
        "EmptyCart" => matches!(err, FeastApiError::EmptyCart),
        "LocationUnavailable" => matches!(err, FeastApiError::LocationUnavailable(_)),
        "NotAuthorized" => matches!(err, FeastApiError::NotAuthorized { .. }),
        "InvalidStatusTransition" => matches!(err, FeastApiError::InvalidStatusTransition { .. }),
        k => panic!("Unknown error kind {k}"),
    };
    assert!(matched, "Expected {kind}, got {err:?}");
}

#[when(expr = "{word} opens the tracking view for the order")]
async fn open_tracking(world: &mut FeastWorld, _name: String) {
    let order_id = world.last_receipt.as_ref().expect("No order has been placed").order_id.clone();
    let system = world.system();
    let tracking = system.feast.tracking(system.location.clone()).track(&order_id).await.expect("Error tracking order");
    world.tracking = Some(tracking);
}

#[when(expr = "{word} watches the cart")]
async fn watch_cart(world: &mut FeastWorld, name: String) {
    world.cart_watch = Some(world.cart(&name).watch().await.expect("Error watching cart"));
}

#[when(expr = "the courier moves to {float}, {float}")]
async fn courier_moves(world: &mut FeastWorld, latitude: f64, longitude: f64) {
    let position = Coordinate::new(latitude, longitude).expect("Invalid test coordinate");
    world.system().location.push_position(position);
}

#[then(expr = "the tracking route has {int} sample(s)")]
async fn route_length(world: &mut FeastWorld, samples: usize) {
    let feed = world.tracking.as_mut().and_then(|t| t.feed.as_mut()).expect("No live tracking feed");
    let state = timeout(WAIT, feed.wait_for(|s| s.route.len() >= samples))
        .await
        .expect("Timed out waiting for route samples")
        .expect("The tracking feed stopped");
    assert_eq!(state.route.len(), samples);
}

#[then(expr = "tracking has finished with {int} sample(s)")]
async fn tracking_finished(world: &mut FeastWorld, samples: usize) {
    let feed = world.tracking.as_mut().and_then(|t| t.feed.as_mut()).expect("No live tracking feed");
    let state = timeout(WAIT, feed.wait_for(|s| s.finished))
        .await
        .expect("Timed out waiting for tracking to finish")
        .expect("The tracking feed stopped without finishing");
    assert_eq!(state.route.len(), samples);
    let location = world.system().location.clone();
    timeout(WAIT, async {
        while location.active_watches() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("The position watch was not released");
    assert_eq!(location.released_watches(), 1);
}

#[then(expr = "the cart badge shows {int}")]
async fn cart_badge(world: &mut FeastWorld, count: usize) {
    let watch = world.cart_watch.as_mut().expect("Nobody is watching the cart");
    let snapshot = timeout(WAIT, watch.wait_for(|s| badge_count(s) == count))
        .await
        .expect("Timed out waiting for the cart badge")
        .expect("The cart watch stopped");
    assert_eq!(badge_count(&snapshot), count);
}

#[then("releasing the live views detaches them from the store and the sensor")]
async fn release_live_views(world: &mut FeastWorld) {
    world.release_live_views().await;
    let system = world.system();
    assert_eq!(system.feast.db().change_feed_listeners(), 0);
    assert_eq!(system.location.active_watches(), 0);
}
