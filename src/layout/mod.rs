pub(crate) mod composite;
pub(crate) mod contract;
pub(crate) mod leaf;
pub(crate) mod sequence;
