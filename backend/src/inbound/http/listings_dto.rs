//! Listing request payloads and their translation into domain values.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CategoryId, Error, FieldUpdate, ImagePath, ItemCondition, ListingDraft, ListingError,
    ListingId, ListingPatch, ListingQuery, ListingStatus, NewImage, PAGE_SIZE_DEFAULT, RateType,
    SearchText, UserId, Window,
};
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, parse_id, parse_optional_id,
    parse_optional_rfc3339_timestamp,
};

#[derive(Debug, Deserialize)]
pub(super) struct ListingPath {
    pub(super) listing_id: String,
}

impl ListingPath {
    pub(super) fn parse(&self) -> Result<ListingId, Error> {
        parse_id(&self.listing_id, FieldName::new("listingId"))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListingImagePath {
    pub(super) listing_id: String,
    pub(super) image_id: String,
}

/// Keeps "absent" and "explicit null" apart: absent stays `None`, null
/// becomes `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_variant<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = ListingError>,
{
    raw.parse().map_err(|err| invalid_value_error(field, err))
}

fn parse_update<T>(raw: Option<Option<String>>, field: FieldName) -> Result<FieldUpdate<T>, Error>
where
    T: FromStr<Err = ListingError>,
{
    let parsed = match raw {
        Some(Some(value)) => Some(Some(parse_variant(&value, field)?)),
        Some(None) => Some(None),
        None => None,
    };
    Ok(FieldUpdate::from_nullable(parsed))
}

/// Search filters for `GET /api/v1/listings`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListingSearchParams {
    /// Case-insensitive text; letters, digits and spaces, at most 40.
    pub q: Option<String>,
    /// `0` or absent means every category.
    pub category_id: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// One of `new`, `like_new`, `good`, `fair`, `poor`, `used`.
    pub condition: Option<String>,
    pub is_skill: Option<bool>,
    /// Defaults to `approved`; admins may ask for any status.
    pub status: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Between 1 and 100; defaults to 20.
    pub page_size: Option<u32>,
}

impl TryFrom<ListingSearchParams> for ListingQuery {
    type Error = Error;

    fn try_from(params: ListingSearchParams) -> Result<Self, Self::Error> {
        let text = SearchText::parse(params.q.as_deref().unwrap_or_default())
            .map_err(|err| invalid_value_error(FieldName::new("q"), err))?;
        let window = Window::page(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(PAGE_SIZE_DEFAULT),
        )
        .map_err(|err| invalid_value_error(FieldName::new("pageSize"), err))?;
        let item_condition = params
            .condition
            .as_deref()
            .map(|raw| parse_variant::<ItemCondition>(raw, FieldName::new("condition")))
            .transpose()?;
        let status = params
            .status
            .as_deref()
            .map(|raw| parse_variant::<ListingStatus>(raw, FieldName::new("status")))
            .transpose()?;
        let query = ListingQuery {
            text,
            item_condition,
            is_skill_sharing: params.is_skill,
            status,
            window,
            ..ListingQuery::default()
        }
        .with_category(params.category_id)
        .with_price_bounds(params.min_price, params.max_price)
        .map_err(|err| invalid_value_error(FieldName::new("minPrice"), err))?;
        Ok(query)
    }
}

/// Body of `POST /api/v1/listings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[schema(example = "Calculus: Early Transcendentals")]
    pub title: String,
    pub description: String,
    #[schema(example = 45.0)]
    pub price: Option<f64>,
    #[schema(example = 2)]
    pub category_id: i32,
    #[schema(example = "good")]
    pub item_condition: String,
    #[serde(default)]
    pub is_skill_sharing: bool,
    pub rate: Option<f64>,
    #[schema(example = "hourly")]
    pub rate_type: Option<String>,
    pub availability: Option<String>,
    pub search_keywords: Option<String>,
}

impl TryFrom<CreateListingRequest> for ListingDraft {
    type Error = Error;

    fn try_from(body: CreateListingRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            item_condition: parse_variant(&body.item_condition, FieldName::new("itemCondition"))?,
            rate_type: body
                .rate_type
                .as_deref()
                .map(|raw| parse_variant::<RateType>(raw, FieldName::new("rateType")))
                .transpose()?,
            title: body.title,
            description: body.description,
            price: body.price,
            category_id: CategoryId::new(body.category_id),
            is_skill_sharing: body.is_skill_sharing,
            rate: body.rate,
            availability: body.availability,
            search_keywords: body.search_keywords,
        })
    }
}

/// Body of `PUT /api/v1/listings/{listing_id}`.
///
/// Absent fields are left alone and `null` clears optional ones. Unknown
/// fields are rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateListingRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>, nullable)]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub item_condition: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<bool>)]
    pub is_skill_sharing: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>, nullable)]
    pub rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub rate_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub availability: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub search_keywords: Option<Option<String>>,
    /// Requested status, e.g. `available` to relist.
    pub status: Option<String>,
    /// Recording a buyer marks the listing sold.
    pub buyer_id: Option<String>,
    /// Sale time; defaults to now.
    pub sold_at: Option<String>,
}

impl TryFrom<UpdateListingRequest> for ListingPatch {
    type Error = Error;

    fn try_from(body: UpdateListingRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            item_condition: parse_update(body.item_condition, FieldName::new("itemCondition"))?,
            rate_type: parse_update(body.rate_type, FieldName::new("rateType"))?,
            status: body
                .status
                .as_deref()
                .map(|raw| parse_variant::<ListingStatus>(raw, FieldName::new("status")))
                .transpose()?,
            buyer_id: parse_optional_id::<UserId>(
                body.buyer_id.as_deref(),
                FieldName::new("buyerId"),
            )?,
            sold_at: parse_optional_rfc3339_timestamp(
                body.sold_at.as_deref(),
                FieldName::new("soldAt"),
            )?,
            title: FieldUpdate::from_nullable(body.title),
            description: FieldUpdate::from_nullable(body.description),
            price: FieldUpdate::from_nullable(body.price),
            category_id: FieldUpdate::from_nullable(
                body.category_id.map(|id| id.map(CategoryId::new)),
            ),
            is_skill_sharing: FieldUpdate::from_nullable(body.is_skill_sharing),
            rate: FieldUpdate::from_nullable(body.rate),
            availability: FieldUpdate::from_nullable(body.availability),
            search_keywords: FieldUpdate::from_nullable(body.search_keywords),
        })
    }
}

/// One image to attach, by stored path.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[schema(example = "listings/5f0c/front.jpg")]
    pub image_path: String,
    pub thumbnail_path: Option<String>,
}

/// Body of `POST /api/v1/listings/{listing_id}/images`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddImagesRequest {
    pub images: Vec<ImageRequest>,
}

impl TryFrom<AddImagesRequest> for Vec<NewImage> {
    type Error = Error;

    fn try_from(body: AddImagesRequest) -> Result<Self, Self::Error> {
        let path = |raw: String, field: &'static str| {
            ImagePath::new(raw).map_err(|err| invalid_value_error(FieldName::new(field), err))
        };
        body.images
            .into_iter()
            .map(|image| {
                Ok(NewImage {
                    image_path: path(image.image_path, "imagePath")?,
                    thumbnail_path: image
                        .thumbnail_path
                        .map(|raw| path(raw, "thumbnailPath"))
                        .transpose()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Result<ListingPatch, Error> {
        let body: UpdateListingRequest = serde_json::from_value(value).expect("valid body");
        ListingPatch::try_from(body)
    }

    #[rstest]
    fn absent_null_and_present_fields_stay_distinct() {
        let patch = update(json!({
            "title": "Desk lamp",
            "price": null,
        }))
        .expect("patch");

        assert_eq!(patch.title, FieldUpdate::Set("Desk lamp".to_owned()));
        assert_eq!(patch.price, FieldUpdate::Clear);
        assert_eq!(patch.description, FieldUpdate::Unchanged);
        assert!(patch.status.is_none());
    }

    #[rstest]
    fn unknown_fields_are_refused() {
        let parsed = serde_json::from_value::<UpdateListingRequest>(json!({"sellerId": "x"}));
        assert!(parsed.is_err());
    }

    #[rstest]
    fn sale_fields_are_parsed() {
        let patch = update(json!({
            "buyerId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "soldAt": "2024-09-02T10:00:00Z",
            "status": "available",
        }))
        .expect("patch");

        assert!(patch.buyer_id.is_some());
        assert!(patch.sold_at.is_some());
        assert_eq!(patch.status, Some(ListingStatus::Available));
    }

    #[rstest]
    #[case(json!({"status": "archived"}), "status")]
    #[case(json!({"itemCondition": "mint"}), "itemCondition")]
    #[case(json!({"buyerId": "bob"}), "buyerId")]
    fn malformed_values_name_the_field(#[case] value: serde_json::Value, #[case] field: &str) {
        let err = update(value).expect_err("invalid");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some(field)
        );
    }

    #[rstest]
    fn search_params_default_to_the_first_page() {
        let query = ListingQuery::try_from(ListingSearchParams {
            q: Some("  Calculus ".to_owned()),
            category_id: Some(0),
            ..ListingSearchParams::default()
        })
        .expect("query");

        assert_eq!(query.text.as_ref().map(SearchText::as_str), Some("calculus"));
        assert!(query.category_id.is_none());
        assert_eq!(query.window, Window::default());
    }

    #[rstest]
    #[case(ListingSearchParams { q: Some("drop table;".to_owned()), ..ListingSearchParams::default() })]
    #[case(ListingSearchParams { page: Some(0), ..ListingSearchParams::default() })]
    #[case(ListingSearchParams { page_size: Some(101), ..ListingSearchParams::default() })]
    #[case(ListingSearchParams { min_price: Some(-1.0), ..ListingSearchParams::default() })]
    fn invalid_search_params_are_rejected(#[case] params: ListingSearchParams) {
        let err = ListingQuery::try_from(params).expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
