pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod encoded;
pub(crate) mod fonts;
pub(crate) mod ingest;
