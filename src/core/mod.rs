// Domain-layer modules: scoring and access resolution
pub mod qualification {
    pub use crate::qualification::*;
}

pub mod engagement {
    pub use crate::engagement::*;
}

pub mod scoring {
    pub use crate::scoring::*;
}

pub mod permissions {
    pub use crate::permissions::*;
}

pub mod access_policy {
    pub use crate::access_policy::*;
}

pub mod resolver {
    pub use crate::resolver::*;
}

pub mod errors {
    pub use crate::errors::*;
}
