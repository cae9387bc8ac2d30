mod t001_order;
mod t002_failure_isolation;
mod t003_stop_after_first_fail;
