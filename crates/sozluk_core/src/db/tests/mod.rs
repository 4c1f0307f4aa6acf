//! Database integration tests.

use super::*;
use crate::error::AppError;
use crate::models::word::WordRecord;
use crate::test_support::{seed_dictionary, setup_temp_db, words};
use std::collections::HashSet;
