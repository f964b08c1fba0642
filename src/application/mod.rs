//! Dispatch pipeline: handler registry, dispatch wrapper, behavior chain
//! and the mediator entry point.

pub mod behaviors;
mod dispatcher;
mod error;
mod handler;
mod mediator;
mod registry;

pub use behaviors::{standard_behaviors, Next, PipelineBehavior};
pub use dispatcher::DispatchWrapper;
pub use error::DispatchError;
pub use handler::{
    DefaultRequestHandler, HandlerConfig, HandlerContext, HandlerLifetime, RequestHandler,
};
pub use mediator::Mediator;
pub use registry::{HandlerRegistry, HandlerRegistryBuilder, Registration};
