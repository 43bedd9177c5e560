mod common;
mod enrollment;
mod routing;
