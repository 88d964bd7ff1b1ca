mod fetch_flow;
mod selection;
