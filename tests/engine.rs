//! End-to-end engine tests against an in-memory database.

use chrono::{DateTime, TimeZone, Utc};

use campus_events_server::engine::{
    attendance, cancel, orders, resources, schedule, BookingRequest, EngineError, FeedbackRequest,
    MaintenanceRequest, NewEvent, PurchaseRequest,
};
use campus_events_server::models::{Event, PaymentStatus};
use campus_events_server::store::catalog::{
    self, NewHost, NewResource, NewStudent, NewTicket, NewVenue,
};
use campus_events_server::store::Store;

async fn setup() -> Store {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 9, 1, hour, 0, 0).unwrap()
}

fn past(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 9, 1, hour, 0, 0).unwrap()
}

async fn seed_host(store: &Store) -> i64 {
    catalog::create_host(
        store.pool(),
        &NewHost {
            name: "Dr. Rao".to_string(),
            email: "rao@campus.edu".to_string(),
            phone: None,
            role: "Professor".to_string(),
            department: Some("CSE".to_string()),
        },
    )
    .await
    .unwrap()
}

async fn seed_student(store: &Store, srn: &str) -> i64 {
    catalog::create_student(
        store.pool(),
        &NewStudent {
            srn: srn.to_string(),
            name: format!("Student {srn}"),
            semester: 5,
            section: "A".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn seed_venue(store: &Store, capacity: i64) -> i64 {
    catalog::create_venue(
        store.pool(),
        &NewVenue {
            name: "Hall A".to_string(),
            building: "Main Block".to_string(),
            capacity,
        },
    )
    .await
    .unwrap()
}

async fn seed_event(
    store: &Store,
    name: &str,
    venue_id: Option<i64>,
    organizer_id: i64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<i64, EngineError> {
    schedule::create_event(
        store,
        &NewEvent {
            name: name.to_string(),
            description: None,
            starts_at,
            ends_at,
            venue_id,
            organizer_id,
            max_participants: 50,
        },
    )
    .await
}

async fn seed_resource(store: &Store, quantity: i64) -> i64 {
    catalog::create_resource(
        store.pool(),
        &NewResource {
            name: "Projector".to_string(),
            kind: "AV Equipment".to_string(),
            quantity,
            description: None,
        },
    )
    .await
    .unwrap()
}

async fn ticket_quantity(store: &Store, ticket_id: i64) -> i64 {
    sqlx::query_scalar("SELECT quantity FROM tickets WHERE id = ?")
        .bind(ticket_id)
        .fetch_one(store.pool())
        .await
        .unwrap()
}

async fn count(store: &Store, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(store.pool()).await.unwrap()
}

#[tokio::test]
async fn venue_schedule_rejects_overlap() {
    let store = setup().await;
    let host = seed_host(&store).await;
    let venue = seed_venue(&store, 100).await;

    let e1 = seed_event(&store, "Tech Talk", Some(venue), host, at(10), at(12))
        .await
        .unwrap();

    let err = seed_event(&store, "Quiz Night", Some(venue), host, at(11), at(13))
        .await
        .unwrap_err();
    match err {
        EngineError::Conflict { id, label } => {
            assert_eq!(id, e1);
            assert_eq!(label, "Tech Talk");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }

    // Touching endpoints are allowed.
    seed_event(&store, "Quiz Night", Some(venue), host, at(12), at(14))
        .await
        .unwrap();
}

#[tokio::test]
async fn event_without_venue_skips_conflict_checks() {
    let store = setup().await;
    let host = seed_host(&store).await;

    seed_event(&store, "Online Meetup", None, host, at(10), at(12))
        .await
        .unwrap();
    seed_event(&store, "Other Meetup", None, host, at(10), at(12))
        .await
        .unwrap();
}

#[tokio::test]
async fn event_capacity_bounded_by_venue() {
    let store = setup().await;
    let host = seed_host(&store).await;
    let venue = seed_venue(&store, 50).await;

    let err = schedule::create_event(
        &store,
        &NewEvent {
            name: "Big Event".to_string(),
            description: None,
            starts_at: at(10),
            ends_at: at(12),
            venue_id: Some(venue),
            organizer_id: host,
            max_participants: 60,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Capacity { remaining: 50 }));
}

#[tokio::test]
async fn event_update_revalidates_schedule() {
    let store = setup().await;
    let host = seed_host(&store).await;
    let venue = seed_venue(&store, 100).await;

    let e1 = seed_event(&store, "Tech Talk", Some(venue), host, at(10), at(12))
        .await
        .unwrap();
    let e2 = seed_event(&store, "Quiz Night", Some(venue), host, at(13), at(14))
        .await
        .unwrap();

    // Moving E2 onto E1's slot is refused and leaves the row unchanged.
    let patch = campus_events_server::models::EventPatch {
        starts_at: Some(at(11)),
        ends_at: Some(at(12)),
        ..Default::default()
    };
    let err = schedule::update_event(&store, e2, &patch).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict { id, .. } if id == e1));

    let row = sqlx::query_as::<_, Event>(
        "SELECT id, name, description, starts_at, ends_at, venue_id, organizer_id, status, \
         max_participants FROM events WHERE id = ?",
    )
    .bind(e2)
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(row.starts_at, at(13));
    assert_eq!(row.ends_at, at(14));

    // An event may be rescheduled within its own slot; it is excluded from
    // the comparison set.
    let patch = campus_events_server::models::EventPatch {
        starts_at: Some(at(10)),
        ends_at: Some(at(11)),
        ..Default::default()
    };
    schedule::update_event(&store, e1, &patch).await.unwrap();

    // And the participant limit stays bounded by the venue.
    let patch = campus_events_server::models::EventPatch {
        max_participants: Some(500),
        ..Default::default()
    };
    let err = schedule::update_event(&store, e1, &patch).await.unwrap_err();
    assert!(matches!(err, EngineError::Capacity { remaining: 100 }));
}

async fn purchase_fixture(store: &Store, quantity: i64) -> (i64, i64, i64) {
    let host = seed_host(store).await;
    let venue = seed_venue(store, 100).await;
    let event = seed_event(store, "Tech Fest", Some(venue), host, at(10), at(12))
        .await
        .unwrap();
    let ticket = catalog::create_ticket(
        store.pool(),
        event,
        &NewTicket {
            ticket_type: "VIP".to_string(),
            price: 100.0,
            quantity,
        },
    )
    .await
    .unwrap();
    let buyer = seed_student(store, "PES2UG23CS042").await;
    (event, ticket, buyer)
}

#[tokio::test]
async fn paid_purchase_decrements_orders_and_registers_once() {
    let store = setup().await;
    let (event, ticket, buyer) = purchase_fixture(&store, 5).await;

    let outcome = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 3,
            paid: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.event_id, event);
    assert_eq!(outcome.order_ids.len(), 3);
    assert_eq!(outcome.total_price, 300.0);
    assert_eq!(outcome.payment_status, PaymentStatus::Completed);
    assert!(outcome.registered);

    assert_eq!(ticket_quantity(&store, ticket).await, 2);
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM orders WHERE payment_status = 'Completed'").await,
        3
    );
    // One registration regardless of units purchased, attendance unmarked.
    assert_eq!(count(&store, "SELECT COUNT(*) FROM event_participants").await, 1);
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM event_participants WHERE attended = 1").await,
        0
    );
}

#[tokio::test]
async fn unpaid_purchase_stays_pending_without_registration() {
    let store = setup().await;
    let (_, ticket, buyer) = purchase_fixture(&store, 5).await;

    let outcome = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 2,
            paid: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.payment_status, PaymentStatus::Pending);
    assert!(!outcome.registered);
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM orders WHERE payment_status = 'Pending'").await,
        2
    );
    assert_eq!(count(&store, "SELECT COUNT(*) FROM event_participants").await, 0);
}

#[tokio::test]
async fn zero_quantity_purchase_touches_nothing() {
    let store = setup().await;
    let (_, ticket, buyer) = purchase_fixture(&store, 5).await;

    let err = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 0,
            paid: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert_eq!(ticket_quantity(&store, ticket).await, 5);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 0);
}

#[tokio::test]
async fn oversold_purchase_is_rejected() {
    let store = setup().await;
    let (_, ticket, buyer) = purchase_fixture(&store, 2).await;

    let err = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 3,
            paid: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientInventory { remaining: 2 }));

    assert_eq!(ticket_quantity(&store, ticket).await, 2);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 0);
}

#[tokio::test]
async fn duplicate_registration_rolls_back_everything() {
    let store = setup().await;
    let (_, ticket, buyer) = purchase_fixture(&store, 5).await;

    orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 1,
            paid: true,
        },
    )
    .await
    .unwrap();

    let err = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 1,
            paid: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateRegistration));

    // The reservation and order rows from the failed attempt are undone.
    assert_eq!(ticket_quantity(&store, ticket).await, 4);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 1);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM event_participants").await, 1);
}

#[tokio::test]
async fn unknown_buyer_rolls_back_reservation() {
    let store = setup().await;
    let (_, ticket, _) = purchase_fixture(&store, 5).await;

    let err = orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: 9999,
            quantity: 2,
            paid: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Integrity(_)));

    assert_eq!(ticket_quantity(&store, ticket).await, 5);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 0);
}

async fn resource_fixture(store: &Store, quantity: i64) -> (i64, i64) {
    let host = seed_host(store).await;
    let event = seed_event(store, "Robotics Expo", None, host, at(9), at(18))
        .await
        .unwrap();
    let resource = seed_resource(store, quantity).await;
    (event, resource)
}

#[tokio::test]
async fn booking_capacity_accumulates_across_overlaps() {
    let store = setup().await;
    let (event, resource) = resource_fixture(&store, 3).await;

    let book = |quantity, start, end| BookingRequest {
        event_id: event,
        resource_id: resource,
        quantity,
        start,
        end,
    };

    let first = resources::book_resource(&store, &book(2, at(10), at(12)))
        .await
        .unwrap();
    assert_eq!(first.remaining, 1);

    // Two units are already drawn during 11:00-12:00; only one is left.
    let err = resources::book_resource(&store, &book(2, at(11), at(13)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Capacity { remaining: 1 }));

    resources::book_resource(&store, &book(1, at(11), at(13)))
        .await
        .unwrap();

    // 12:00-14:00 only overlaps the second booking, so two units remain.
    let third = resources::book_resource(&store, &book(2, at(12), at(14)))
        .await
        .unwrap();
    assert_eq!(third.remaining, 0);
}

#[tokio::test]
async fn booking_beyond_total_quantity_is_rejected_outright() {
    let store = setup().await;
    let (event, resource) = resource_fixture(&store, 3).await;

    let err = resources::book_resource(
        &store,
        &BookingRequest {
            event_id: event,
            resource_id: resource,
            quantity: 4,
            start: at(10),
            end: at(12),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Capacity { remaining: 3 }));
}

#[tokio::test]
async fn maintenance_window_blocks_booking() {
    let store = setup().await;
    let (event, resource) = resource_fixture(&store, 3).await;

    resources::schedule_maintenance(
        &store,
        &MaintenanceRequest {
            resource_id: resource,
            start: at(10),
            end: at(12),
            description: "Annual service".to_string(),
        },
    )
    .await
    .unwrap();

    let err = resources::book_resource(
        &store,
        &BookingRequest {
            event_id: event,
            resource_id: resource,
            quantity: 1,
            start: at(11),
            end: at(13),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Conflict { ref label, .. } if label == "Annual service"));

    // A slot that only touches the window is fine.
    resources::book_resource(
        &store,
        &BookingRequest {
            event_id: event,
            resource_id: resource,
            quantity: 1,
            start: at(12),
            end: at(14),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn booking_blocks_maintenance_and_status_flips_on_success() {
    let store = setup().await;
    let (event, resource) = resource_fixture(&store, 3).await;

    resources::book_resource(
        &store,
        &BookingRequest {
            event_id: event,
            resource_id: resource,
            quantity: 1,
            start: at(10),
            end: at(12),
        },
    )
    .await
    .unwrap();

    let err = resources::schedule_maintenance(
        &store,
        &MaintenanceRequest {
            resource_id: resource,
            start: at(11),
            end: at(13),
            description: "Lamp swap".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Conflict { ref label, .. } if label == "Robotics Expo"));

    resources::schedule_maintenance(
        &store,
        &MaintenanceRequest {
            resource_id: resource,
            start: at(12),
            end: at(13),
            description: "Lamp swap".to_string(),
        },
    )
    .await
    .unwrap();

    let (status, available): (String, bool) = sqlx::query_as(
        "SELECT maintenance_status, is_available FROM resources WHERE id = ?",
    )
    .bind(resource)
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(status, "Under Maintenance");
    assert!(!available);
}

#[tokio::test]
async fn inverted_or_empty_ranges_are_validation_errors() {
    let store = setup().await;
    let host = seed_host(&store).await;
    let (event, resource) = {
        let event = seed_event(&store, "Expo", None, host, at(9), at(18))
            .await
            .unwrap();
        (event, seed_resource(&store, 3).await)
    };

    let err = resources::book_resource(
        &store,
        &BookingRequest {
            event_id: event,
            resource_id: resource,
            quantity: 1,
            start: at(12),
            end: at(12),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = resources::schedule_maintenance(
        &store,
        &MaintenanceRequest {
            resource_id: resource,
            start: at(13),
            end: at(12),
            description: "Backwards".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = seed_event(&store, "Instant", None, host, at(10), at(10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn feedback_requires_attendance_and_submits_once() {
    let store = setup().await;
    let (event, ticket, buyer) = purchase_fixture(&store, 5).await;

    orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 1,
            paid: true,
        },
    )
    .await
    .unwrap();

    let feedback = FeedbackRequest {
        event_id: event,
        user_id: buyer,
        rating: 5,
        comments: Some("Great event".to_string()),
    };

    // Registered but not yet marked as attended.
    let err = attendance::submit_feedback(&store, &feedback).await.unwrap_err();
    assert!(matches!(err, EngineError::NotEligible));

    attendance::mark_attendance(&store, event, buyer).await.unwrap();
    // Marking again is a no-op, not an error.
    attendance::mark_attendance(&store, event, buyer).await.unwrap();

    attendance::submit_feedback(&store, &feedback).await.unwrap();

    let err = attendance::submit_feedback(&store, &feedback).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadySubmitted));

    let report = catalog::feedback_for_event(store.pool(), event).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].rating, 5);
}

#[tokio::test]
async fn feedback_rating_is_validated_before_any_lookup() {
    let store = setup().await;
    let (event, _, _) = purchase_fixture(&store, 5).await;

    // An out-of-range rating from an unregistered user reports the rating
    // problem, not the missing registration.
    let err = attendance::submit_feedback(
        &store,
        &FeedbackRequest {
            event_id: event,
            user_id: 9999,
            rating: 6,
            comments: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn feedback_from_stranger_is_not_registered() {
    let store = setup().await;
    let (event, _, _) = purchase_fixture(&store, 5).await;
    let stranger = seed_student(&store, "PES2UG23CS099").await;

    let err = attendance::submit_feedback(
        &store,
        &FeedbackRequest {
            event_id: event,
            user_id: stranger,
            rating: 4,
            comments: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::NotRegistered));

    let err = attendance::mark_attendance(&store, event, stranger).await.unwrap_err();
    assert!(matches!(err, EngineError::NotRegistered));
}

#[tokio::test]
async fn cancellation_refunds_the_purchased_tickets() {
    let store = setup().await;
    let (event, ticket, buyer) = purchase_fixture(&store, 5).await;

    orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 3,
            paid: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(ticket_quantity(&store, ticket).await, 2);

    let outcome = cancel::cancel_registration(&store, event, buyer).await.unwrap();
    assert_eq!(outcome.orders_removed, 3);
    assert_eq!(outcome.units_refunded, 3);

    assert_eq!(ticket_quantity(&store, ticket).await, 5);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 0);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM event_participants").await, 0);
}

#[tokio::test]
async fn cancelling_without_registration_changes_nothing() {
    let store = setup().await;
    let (event, ticket, buyer) = purchase_fixture(&store, 5).await;

    for _ in 0..2 {
        let err = cancel::cancel_registration(&store, event, buyer).await.unwrap_err();
        assert!(matches!(err, EngineError::NotRegistered));
    }

    assert_eq!(ticket_quantity(&store, ticket).await, 5);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM orders").await, 0);
}

#[tokio::test]
async fn event_listings_split_on_end_time() {
    let store = setup().await;
    let host = seed_host(&store).await;

    let upcoming = seed_event(&store, "Future Fest", None, host, at(10), at(12))
        .await
        .unwrap();
    let completed = seed_event(&store, "Past Fest", None, host, past(10), past(12))
        .await
        .unwrap();

    let listed = catalog::upcoming_events(store.pool()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, upcoming);

    let listed = catalog::completed_events(store.pool()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, completed);
}

#[tokio::test]
async fn registrations_listing_follows_purchases() {
    let store = setup().await;
    let (event, ticket, buyer) = purchase_fixture(&store, 5).await;

    assert!(catalog::registrations_for(store.pool(), buyer)
        .await
        .unwrap()
        .is_empty());

    orders::purchase(
        &store,
        &PurchaseRequest {
            ticket_id: ticket,
            buyer_id: buyer,
            quantity: 1,
            paid: true,
        },
    )
    .await
    .unwrap();

    let registrations = catalog::registrations_for(store.pool(), buyer).await.unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].id, event);
}

#[tokio::test]
async fn ticket_patch_updates_only_present_fields() {
    let store = setup().await;
    let (_, ticket, _) = purchase_fixture(&store, 5).await;

    catalog::update_ticket(
        store.pool(),
        ticket,
        &campus_events_server::models::TicketPatch {
            price: Some(150.0),
            quantity: None,
        },
    )
    .await
    .unwrap();

    let (price, quantity): (f64, i64) =
        sqlx::query_as("SELECT price, quantity FROM tickets WHERE id = ?")
            .bind(ticket)
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(price, 150.0);
    assert_eq!(quantity, 5);

    let err = catalog::update_ticket(
        store.pool(),
        ticket,
        &campus_events_server::models::TicketPatch::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = catalog::update_ticket(
        store.pool(),
        9999,
        &campus_events_server::models::TicketPatch {
            price: Some(1.0),
            quantity: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_srn_hits_the_integrity_backstop() {
    let store = setup().await;
    seed_student(&store, "PES2UG23CS001").await;

    let err = catalog::create_student(
        store.pool(),
        &NewStudent {
            srn: "PES2UG23CS001".to_string(),
            name: "Duplicate".to_string(),
            semester: 3,
            section: "B".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Integrity(_)));
}
