use crate::api::{drinks, health};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const DRINKS_TAG: &str = "Drinks API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::ready_check,
        drinks::list_drinks,
        drinks::list_drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = DRINKS_TAG, description = "Drinks catalog endpoints"),
    ),
    info(
        title = "Drinks API",
        description = "Drinks catalog with permission-based access",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
