mod common;
mod crud_test;
mod health_test;
