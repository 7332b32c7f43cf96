pub(crate) mod deferred;
pub(crate) mod sink;
