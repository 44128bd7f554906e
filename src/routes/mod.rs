use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, headers};
use crate::handlers::{directory, events, health_check, orders, resources, tickets, venues};
use crate::store::Store;

pub fn create_routes(store: Store) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/students",
            get(directory::list_students).post(directory::create_student),
        )
        .route(
            "/students/:id/registrations",
            get(directory::my_registrations),
        )
        .route(
            "/hosts",
            get(directory::list_hosts).post(directory::create_host),
        )
        .route(
            "/venues",
            get(venues::list_venues).post(venues::create_venue),
        )
        .route(
            "/venues/:id/availability",
            put(venues::set_venue_availability),
        )
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route("/events/registration-counts", get(events::registration_counts))
        .route("/events/:id", patch(events::update_event))
        .route("/events/:id/participants", get(events::list_participants))
        .route(
            "/events/:id/participants/:user_id/attendance",
            post(events::mark_attendance),
        )
        .route(
            "/events/:id/registrations/:user_id",
            delete(events::cancel_registration),
        )
        .route(
            "/events/:id/feedback",
            get(events::event_feedback).post(events::submit_feedback),
        )
        .route(
            "/events/:id/tickets",
            get(tickets::list_event_tickets).post(tickets::create_ticket),
        )
        .route("/tickets/:id", patch(tickets::update_ticket))
        .route("/orders", post(orders::purchase))
        .route(
            "/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route("/resources/:id/status", put(resources::set_resource_status))
        .route(
            "/resources/:id/maintenance",
            post(resources::schedule_maintenance),
        )
        .route("/resources/:id/bookings", post(resources::book_resource))
        .layer(TraceLayer::new_for_http())
        .layer(headers::content_type_options_layer())
        .layer(headers::frame_options_layer())
        .layer(headers::content_security_policy_layer())
        .layer(headers::referrer_policy_layer())
        .layer(create_cors_layer())
        .with_state(store)
}
