/// Limit/offset pagination for list endpoints
///
/// Without `limit` a list endpoint returns a bare JSON array. With it, the
/// response becomes `{count, next, previous, results}`.
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::db::Page;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of results to return per page (1-100)
    pub limit: Option<i64>,
    /// The initial index from which to return the results
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn is_paginated(&self) -> bool {
        self.limit.is_some()
    }

    /// Store slice for this request; unpaginated requests get every row
    pub fn page(&self) -> Page {
        match self.limit {
            Some(limit) => Page {
                limit: Some(limit.clamp(1, MAX_PAGE_SIZE)),
                offset: self.offset.unwrap_or(0).max(0),
            },
            None => Page::all(),
        }
    }
}

/// Limit/offset envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(req: &HttpRequest, page: Page, count: i64, results: Vec<T>) -> Self {
        let limit = page.limit.unwrap_or(MAX_PAGE_SIZE);
        let offset = page.offset;

        // offset comes straight from the query string and may be near i64::MAX
        let next = offset
            .checked_add(limit)
            .filter(|next| *next < count)
            .map(|next| page_url(req, limit, Some(next)));
        let previous = (offset > 0).then(|| {
            let prev = offset - limit;
            page_url(req, limit, (prev > 0).then_some(prev))
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Absolute URL of the current path with `limit`/`offset` replaced.
/// Other query parameters are kept in order.
fn page_url(req: &HttpRequest, limit: i64, offset: Option<i64>) -> String {
    let info = req.connection_info();
    let mut query: Vec<String> = req
        .query_string()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            key != "limit" && key != "offset"
        })
        .map(str::to_owned)
        .collect();

    query.push(format!("limit={}", limit));
    if let Some(offset) = offset {
        query.push(format!("offset={}", offset));
    }

    format!(
        "{}://{}{}?{}",
        info.scheme(),
        info.host(),
        req.path(),
        query.join("&")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn params(limit: Option<i64>, offset: Option<i64>) -> PaginationParams {
        PaginationParams { limit, offset }
    }

    #[test]
    fn unpaginated_without_limit() {
        let p = params(None, Some(10));
        assert!(!p.is_paginated());
        assert_eq!(p.page(), Page::all());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(params(Some(0), None).page().limit, Some(1));
        assert_eq!(params(Some(1000), None).page().limit, Some(MAX_PAGE_SIZE));
        assert_eq!(params(Some(5), Some(-3)).page().offset, 0);
    }

    #[test]
    fn envelope_links() {
        let req = TestRequest::get()
            .uri("/api/v1/posts?limit=2&offset=2")
            .insert_header(("host", "testserver"))
            .to_http_request();
        let page = params(Some(2), Some(2)).page();

        let body = Paginated::new(&req, page, 5, vec![3, 4]);
        assert_eq!(body.count, 5);
        assert_eq!(
            body.next.as_deref(),
            Some("http://testserver/api/v1/posts?limit=2&offset=4")
        );
        // offset 0 is dropped from the previous link
        assert_eq!(
            body.previous.as_deref(),
            Some("http://testserver/api/v1/posts?limit=2")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let req = TestRequest::get()
            .uri("/api/v1/posts?limit=2&offset=4&q=x")
            .insert_header(("host", "testserver"))
            .to_http_request();
        let page = params(Some(2), Some(4)).page();

        let body = Paginated::new(&req, page, 5, vec![5]);
        assert!(body.next.is_none());
        assert_eq!(
            body.previous.as_deref(),
            Some("http://testserver/api/v1/posts?q=x&limit=2&offset=2")
        );
    }

    #[test]
    fn huge_offset_has_no_next() {
        let req = TestRequest::get()
            .uri("/api/v1/posts?limit=1&offset=9223372036854775807")
            .insert_header(("host", "testserver"))
            .to_http_request();
        let page = params(Some(1), Some(i64::MAX)).page();
        assert_eq!(page.offset, i64::MAX);

        let body = Paginated::<i64>::new(&req, page, 5, Vec::new());
        assert!(body.next.is_none());
        assert_eq!(
            body.previous.as_deref(),
            Some("http://testserver/api/v1/posts?limit=1&offset=9223372036854775806")
        );
    }
}
