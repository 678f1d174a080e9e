// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signal Handling
//!
//! Listens for SIGTERM/SIGINT (and SIGHUP on Unix) and triggers a
//! [`crate::shutdown::ShutdownCoordinator`]'s shutdown sequence. A CLI
//! invocation that completes before any signal arrives never touches this
//! module; it matters for `run`/`rerun` calls long enough to be interrupted
//! mid-suite.

use crate::shutdown::ShutdownCoordinator;

#[cfg(unix)]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sighup.recv() => tracing::info!("received SIGHUP"),
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
    }
    coordinator.initiate_shutdown();
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal(coordinator: ShutdownCoordinator) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received Ctrl-C");
    coordinator.initiate_shutdown();
}
