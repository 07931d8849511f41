use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Bid Bazaar Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::websocket::viewer_socket,
        crate::routes::admin::login,
        crate::routes::admin::logout,
        crate::routes::teams::list_teams,
        crate::routes::teams::get_team,
        crate::routes::teams::create_team,
        crate::routes::teams::delete_team,
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::update_product,
        crate::routes::products::delete_product,
        crate::routes::products::set_current,
        crate::routes::products::mark_sold,
        crate::routes::effects::mystery_effect,
        crate::routes::effects::steal_power,
        crate::routes::countdown::countdown_state,
        crate::routes::countdown::start_showcase,
        crate::routes::countdown::start_preview,
        crate::routes::display::display_state,
        crate::routes::display::toggle_leaderboard,
        crate::routes::display::end_event,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::team::TeamSummary,
            crate::dto::team::CreateTeamRequest,
            crate::dto::product::ProductView,
            crate::dto::product::ProductUpload,
            crate::state::catalog::ProductStatus,
            crate::state::catalog::ProductType,
            crate::dto::admin::LoginRequest,
            crate::dto::admin::LoginResponse,
            crate::dto::admin::ActionResponse,
            crate::dto::admin::MarkSoldRequest,
            crate::dto::admin::CountdownRequest,
            crate::dto::admin::StealPowerRequest,
            crate::dto::admin::MysteryEffectRequest,
            crate::dto::admin::MysteryEffectResponse,
            crate::dto::admin::EventEndResponse,
            crate::state::mystery::EffectKind,
            crate::state::countdown::CountdownState,
            crate::state::countdown::CountdownKind,
            crate::dto::display::DisplaySnapshot,
            crate::dto::display::LeaderboardRequest,
            crate::dto::display::LeaderboardToggleEvent,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::ProductSoldEvent,
            crate::dto::sse::MysteryRevealedEvent,
            crate::dto::sse::MysteryCardAwardedEvent,
            crate::dto::sse::PointsStolenEvent,
            crate::dto::sse::PreviewStartedEvent,
            crate::dto::sse::StealPowerAwardedEvent,
            crate::dto::ws::ViewerInboundMessage,
            crate::dto::ws::ViewerEnvelope,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "viewers", description = "WebSocket feed for display screens"),
        (name = "admin", description = "Admin session management"),
        (name = "teams", description = "Team ledger"),
        (name = "products", description = "Product catalog and auction lifecycle"),
        (name = "effects", description = "Mystery card effects"),
        (name = "countdown", description = "Showcase and preview countdowns"),
        (name = "display", description = "Display screen state and event wrap-up"),
    )
)]
pub struct ApiDoc;
