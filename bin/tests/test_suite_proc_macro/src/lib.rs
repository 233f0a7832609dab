use quote::{format_ident, quote};

/// One `#[test]` per `*.expr` file below `bin/tests`.
#[proc_macro]
pub fn generate_tests(_: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let root_dir = format!("{}/..", env!("CARGO_MANIFEST_DIR"));
    let tests = walkdir::WalkDir::new(root_dir.clone())
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("expr".as_ref()))
        .filter_map(|entry| {
            let test_file_path = entry.path().to_string_lossy().into_owned();
            let relative_test_path =
                entry.path().strip_prefix(&root_dir).ok()?.with_extension("");
            let test_ident = format_ident!(
                "test_{}",
                relative_test_path.to_string_lossy().replace(['/', '-'], "_")
            );
            Some(quote! {
                #[test]
                fn #test_ident() {
                    expr_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
                }
            })
        });

    quote! {
        #[ctor::ctor]
        fn init() {
            env_logger::init();
        }

        #(#tests)*
    }
    .into()
}
