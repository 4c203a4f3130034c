//! The fail-open wrapper around a single generator invocation.
//!
//! Every invocation runs through [`run_invocation`], which is the one place
//! where generator faults are contained. Whatever happens inside (an error, a
//! panic, a resource that cannot be acquired, cancellation at the budget
//! ceiling) the result is a [`GenerationOutcome`], never a propagated fault.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::context::{Context, GenerationContext};
use crate::error::GeneratorError;
use crate::generator::Generator;
use crate::item::Item;
use crate::pool::{HandlePool, ResourceFactory};

use super::outcome::GenerationOutcome;

/// Run one generator against its own copy of `context` and its own handle.
///
/// Returns as soon as the generator finishes or `cancel` fires, whichever
/// comes first. On cancellation the generator future is dropped, which drops
/// any I/O it was awaiting and releases the handle before this returns.
pub(crate) async fn run_invocation<F: ResourceFactory>(
    generator: Arc<dyn Generator<F::Resource>>,
    pool: Arc<HandlePool<F>>,
    context: Context,
    cancel: CancellationToken,
) -> GenerationOutcome {
    let name = generator.name().to_owned();
    let started = Instant::now();

    let work = AssertUnwindSafe(invoke(generator.as_ref(), pool.as_ref(), context)).catch_unwind();

    tokio::select! {
        biased;
        () = cancel.cancelled() => GenerationOutcome::cancelled(name, started.elapsed()),
        result = work => match result {
            Ok(Ok(items)) => GenerationOutcome::succeeded(name, items, started.elapsed()),
            Ok(Err(err)) => GenerationOutcome::failed(name, err.to_string(), started.elapsed()),
            Err(panic) => GenerationOutcome::failed(
                name,
                format!("generator panicked: {}", panic_message(panic.as_ref())),
                started.elapsed(),
            ),
        },
    }
}

/// Acquire a handle, produce, release.
async fn invoke<F: ResourceFactory>(
    generator: &dyn Generator<F::Resource>,
    pool: &HandlePool<F>,
    context: Context,
) -> Result<Vec<Item>, GeneratorError> {
    let handle = pool.acquire().await?;
    let mut ctx = GenerationContext::new(context, handle);
    generator.produce(&mut ctx).await
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
