//! Routing: travel modes, the routing service client, route summaries and
//! the coordinator that decides when a route is requested and whether its
//! result still applies.

mod coordinator;
mod http;
mod osrm;
mod state;
mod summary;
mod types;

pub use coordinator::{CoordinatorConfig, RouteCoordinator, MAP_NOT_READY_MESSAGE};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT};
pub use osrm::{OsrmRouter, NO_ROUTE_MESSAGE};
pub use state::{RoutingState, RoutingStateSink, RoutingUpdate, SharedRoutingState};
pub use summary::{failure_message, format_route, format_summary};
pub use types::{
    profile_for, BoxFuture, ParseTravelModeError, Route, RouteOutcome, RouteRequest,
    RouteSnapshot, Router, RoutingError, RoutingStatus, TravelMode,
};
