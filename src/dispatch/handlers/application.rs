//! application requests: translates its `Kind`s into a generic engine call.

use crate::engine::Engine;
use crate::model::{Reply, Request};
use crate::dispatch::{self, Family, Kind};
use tokio::sync::watch;

pub async fn handle(engine: &dyn Engine, kind: Kind, request: &Request, cancel: watch::Receiver<bool>) -> Reply {
    dispatch::execute(engine, Family::Application, kind, request, cancel).await
}
