pub(crate) mod filename;
pub(crate) mod rasterizer;
pub(crate) mod sink;
