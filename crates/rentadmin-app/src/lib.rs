// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dashboard;
pub mod entity;
pub mod error;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod resources;
pub mod state;

pub use dashboard::*;
pub use entity::*;
pub use error::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use state::*;
