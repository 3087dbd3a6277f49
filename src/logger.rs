//SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use std::fmt::Debug;

/// The log sink. Receives fully formatted records.
pub trait Logger: Debug + Send + Sync {
    /**
        Submits the log record for writing.
    */
    fn finish_log_record(&self, record: LogRecord);

    /**
    Submits the log record for writing asynchronously.

    Loggers may choose to implement this as a simple wrapper around [Self::finish_log_record] if they wish.
    */
    fn finish_log_record_async<'s>(
        &'s self,
        record: LogRecord,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 's>> {
        Box::pin(async move { self.finish_log_record(record) })
    }

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}
