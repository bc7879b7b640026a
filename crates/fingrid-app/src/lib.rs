// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod ids;
pub mod legend;
pub mod model;
pub mod schema;
pub mod sort;
pub mod state;

pub use error::*;
pub use ids::*;
pub use legend::*;
pub use model::*;
pub use schema::*;
pub use sort::*;
pub use state::*;
