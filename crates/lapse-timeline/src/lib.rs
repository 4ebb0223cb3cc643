//! Timeline navigation: state store, navigation controller and the view
//! projection it drives.

pub mod bootstrap;
pub mod controller;
pub mod input;
pub mod store;
pub mod view;

pub use bootstrap::InitialPage;
pub use controller::{DayRequest, DayResponse, Dispatch, NavigationController, SwitchOutcome};
pub use input::{KeyPress, NavInput};
pub use store::{Rejection, TimelineState, TimelineStore};
pub use view::{render, RenderFrame, RenderScope, ViewModel, ViewSink};
