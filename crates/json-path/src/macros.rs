#[macro_export]
macro_rules! json_path {
    ($path:expr) => {
        <$crate::JsonPath as ::std::str::FromStr>::from_str($path).expect("valid json path")
    };
}
