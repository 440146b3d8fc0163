use domains::models::{covers, CoverQuery, PresetCover, SUGGESTED_TAGS};

use crate::extract::Params;
use crate::response::{ApiResponse, ApiResult};

pub async fn tags() -> ApiResponse<&'static [&'static str]> {
    ApiResponse::ok(SUGGESTED_TAGS.as_slice())
}

pub async fn preset_covers(Params(query): Params<CoverQuery>) -> ApiResult<Vec<PresetCover>> {
    Ok(ApiResponse::ok(covers(&query)))
}
