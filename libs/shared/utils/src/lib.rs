pub mod test_utils;
