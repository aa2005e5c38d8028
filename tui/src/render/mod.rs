pub(crate) mod renderable;
