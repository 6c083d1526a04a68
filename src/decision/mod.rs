//! The opponent's decision boundary: what is sent out, what comes back,
//! how replies are made legal, and what happens when none arrives.

pub mod fallback;
pub mod provider;
pub mod validate;
pub mod view;

pub use fallback::{FallbackPolicy, WeightedFallback};
pub use provider::{DecisionError, DecisionProvider, DecisionRequest, DecisionResponse};
pub use validate::{coerce, Coercion, DecisionStats, Legality, RaiseBlock, Validated};
pub use view::{GameView, HandCard, VisibleAction, VisibleCard, VisibleTrick};
