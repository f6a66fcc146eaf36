use serde::Deserialize;

/// Sort keys accepted by list/search. `Relevance` exists only for API
/// compatibility: there is no scored ranking, it degrades to `UpdatedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    UpdatedAt,
    CreatedAt,
    Title,
    Relevance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Paging and filtering options shared by list and search.
/// Pages are 1-indexed; offset = (page - 1) * limit.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub template: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Whitelisted ORDER BY fragment; sort keys never reach SQL as user input.
pub fn order_clause(sort_by: SortBy, order: SortOrder) -> &'static str {
    let column = match sort_by {
        SortBy::Title => "title",
        SortBy::CreatedAt => "created_at",
        // Relevance has already been resolved to updatedAt by the caller.
        SortBy::UpdatedAt | SortBy::Relevance => "updated_at",
    };
    match (column, order) {
        ("title", SortOrder::Asc) => "title ASC",
        ("title", SortOrder::Desc) => "title DESC",
        ("created_at", SortOrder::Asc) => "created_at ASC",
        ("created_at", SortOrder::Desc) => "created_at DESC",
        (_, SortOrder::Asc) => "updated_at ASC",
        (_, SortOrder::Desc) => "updated_at DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_indexed() {
        let query = ListQuery {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn defaults_are_page_one_limit_ten() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn page_zero_is_clamped() {
        let query = ListQuery {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn order_clause_is_whitelisted() {
        assert_eq!(order_clause(SortBy::Title, SortOrder::Asc), "title ASC");
        assert_eq!(
            order_clause(SortBy::CreatedAt, SortOrder::Desc),
            "created_at DESC"
        );
        assert_eq!(
            order_clause(SortBy::UpdatedAt, SortOrder::Desc),
            "updated_at DESC"
        );
        assert_eq!(
            order_clause(SortBy::Relevance, SortOrder::Desc),
            "updated_at DESC"
        );
    }

    #[test]
    fn sort_keys_parse_from_camel_case() {
        let query: ListQuery =
            serde_json::from_str(r#"{"sortBy": "createdAt", "sortOrder": "asc"}"#).unwrap();
        assert_eq!(query.sort_by, Some(SortBy::CreatedAt));
        assert_eq!(query.sort_order, Some(SortOrder::Asc));
    }
}
