pub mod artifact;
pub mod linear;
pub mod model_set;
pub mod traits;
pub mod tree;

pub use artifact::{ModelArtifact, ModelBody};
pub use linear::LinearModel;
pub use model_set::ModelSet;
pub use traits::{Regressor, SharedRegressor};
pub use tree::{RegressionTree, TreeEnsemble, TreeNode};
