//! Print the OpenAPI document for the default route table as JSON.

use std::io::Write as _;

use users_api::ApiDoc;
use users_api::inbound::http::routes::RouteTable;
use users_api::server::DEFAULT_ROUTE_PREFIX;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let doc = ApiDoc::for_routes(&RouteTable::users(), DEFAULT_ROUTE_PREFIX);
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", doc.to_pretty_json()?)?;
    Ok(())
}
