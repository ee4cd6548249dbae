//! CLI parsing tests for count command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "count",
        test_name: test_count_requires_table,
        required_arg: "--table",
    }

    crate::cli_option_test! {
        command: "count",
        variant: Count,
        test_name: test_count_with_group_by,
        args: ["-t", "users", "-g", "team"],
        field: group_by,
        expected: vec!["team".to_string()],
    }
}
