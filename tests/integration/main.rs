//! End-to-end scenarios over the service layer with a scripted remote.

mod helpers;
mod sync_test;
mod transcript_test;
