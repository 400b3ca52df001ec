//! Input extraction shared by the collection and show actions.

use serde::Serialize;

use crate::actions::{Problem, Reply, RequestContext};
use crate::data::{Order, PageQuery, Paged, Scope};

/// Read `cursor`, `order` and `limit` from the query string.
pub fn page_query(ctx: &RequestContext) -> Result<PageQuery, Problem> {
    let mut page = PageQuery::default();

    if let Some(raw) = ctx.query("cursor") {
        let cursor = raw
            .parse()
            .map_err(|_| Problem::bad_request("cursor", "expected a paging token"))?;
        page.cursor = Some(cursor);
    }

    if let Some(raw) = ctx.query("order") {
        page.order = match raw {
            "asc" => Order::Asc,
            "desc" => Order::Desc,
            _ => return Err(Problem::bad_request("order", "expected 'asc' or 'desc'")),
        };
    }

    if let Some(raw) = ctx.query("limit") {
        let limit: u32 = raw.parse().unwrap_or(0);
        if limit == 0 || limit > PageQuery::MAX_LIMIT {
            return Err(Problem::bad_request(
                "limit",
                format!("expected a number between 1 and {}", PageQuery::MAX_LIMIT),
            ));
        }
        page.limit = limit;
    }

    Ok(page)
}

pub fn ledger_sequence(ctx: &RequestContext, name: &str) -> Result<u32, Problem> {
    ctx.parse_param(name, "a ledger sequence")
}

pub fn operation_id(ctx: &RequestContext, name: &str) -> Result<u64, Problem> {
    ctx.parse_param(name, "an operation id")
}

/// Account ids are base32 strings (`A-Z`, `2-7`).
pub fn account_id(ctx: &RequestContext, name: &str) -> Result<String, Problem> {
    let raw = ctx
        .param(name)
        .ok_or_else(|| Problem::bad_request(name, "missing"))?;
    let valid = !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
    if valid {
        Ok(raw.to_string())
    } else {
        Err(Problem::bad_request(name, "expected an account id"))
    }
}

/// Transaction ids are hex-encoded hashes.
pub fn transaction_id(ctx: &RequestContext, name: &str) -> Result<String, Problem> {
    let raw = ctx
        .param(name)
        .ok_or_else(|| Problem::bad_request(name, "missing"))?;
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(raw.to_ascii_lowercase())
    } else {
        Err(Problem::bad_request(name, "expected a transaction hash"))
    }
}

/// Scope implied by whichever parent parameter the route carries.
pub fn scope(ctx: &RequestContext) -> Result<Scope, Problem> {
    if ctx.param("account_id").is_some() {
        return account_id(ctx, "account_id").map(Scope::Account);
    }
    if ctx.param("ledger_id").is_some() {
        return ledger_sequence(ctx, "ledger_id").map(Scope::Ledger);
    }
    if ctx.param("tx_id").is_some() {
        return transaction_id(ctx, "tx_id").map(Scope::Transaction);
    }
    Ok(Scope::All)
}

#[derive(Debug, Serialize)]
struct Link {
    href: String,
}

#[derive(Debug, Serialize)]
struct PageLinks {
    #[serde(rename = "self")]
    this: Link,
    next: Link,
    prev: Link,
}

#[derive(Debug, Serialize)]
struct Embedded<T> {
    records: Vec<T>,
}

/// One page of a collection with navigation links.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    #[serde(rename = "_links")]
    links: PageLinks,
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
}

impl<T: Paged + Serialize> Page<T> {
    pub fn new(path: &str, query: &PageQuery, records: Vec<T>) -> Self {
        let first = records.first().map(Paged::paging_token).or(query.cursor);
        let last = records.last().map(Paged::paging_token).or(query.cursor);

        Self {
            links: PageLinks {
                this: link(path, query.cursor, query.order, query.limit),
                next: link(path, last, query.order, query.limit),
                prev: link(path, first, query.order.reverse(), query.limit),
            },
            embedded: Embedded { records },
        }
    }

    pub fn into_reply(self) -> Result<Reply, Problem> {
        Reply::resource(&self)
    }
}

fn link(path: &str, cursor: Option<u64>, order: Order, limit: u32) -> Link {
    let href = match cursor {
        Some(cursor) => format!("{path}?order={}&limit={limit}&cursor={cursor}", order.as_str()),
        None => format!("{path}?order={}&limit={limit}", order.as_str()),
    };
    Link { href }
}
