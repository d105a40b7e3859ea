mod active_elections;
mod conflicts;
mod ledger_confirm;
mod request_aggregator;
mod unchecked_map;
mod votes;
