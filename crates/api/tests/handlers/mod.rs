mod appointments_test;
mod availability_test;
mod middleware_test;
mod notifications_test;
mod schedule_test;
