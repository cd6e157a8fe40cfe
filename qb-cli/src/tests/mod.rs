mod cli_test;

use rstest::*;

use super::*;
