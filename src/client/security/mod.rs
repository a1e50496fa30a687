pub(crate) mod apple;
