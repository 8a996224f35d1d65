// UI module - Slint window, view model and event loop bridge
//
// This module contains:
// - EventLoopBridge: Coordinates between tokio async runtime and Slint event loop
// - WindowView: Send-able view model built from state snapshots
// - GuiController: Wires the window's callbacks to the AppController

pub mod bridge;
pub mod controller;
pub mod view;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiController;
pub use view::WindowView;
