use proc_macro::TokenStream;

mod extension;

/// Derive an extension's capability table from the phase methods of an
/// inherent `impl` block.
///
/// Recognized method names are `preread`, `access`, `header_filter`,
/// `body_filter` and `log`. Each must have the shape
/// `async fn(&self, ctx: &mut Ctx, config: &Value) -> Result<(), E>` where
/// `E: Into<BoxError>`. Every method present becomes a phase in
/// `ExtensionMeta::phases`; phases without a method are never dispatched.
///
/// # Arguments
///
/// - `name = "..."` (required): the registered extension name
/// - `priority = N` (optional, default `0`): registry ordering hint
/// - `context = Type` (optional): the request context type, required only
///   when it cannot be read from a phase method
///
/// # Example
///
/// ```rust,ignore
/// struct RateLimit;
///
/// #[tagexec::extension(name = "rate-limit", priority = 1001)]
/// impl RateLimit {
///     async fn access(&self, ctx: &mut RequestCtx, config: &Value) -> Result<(), BoxError> {
///         ctx.limit = config["limit"].as_u64();
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn extension(attr: TokenStream, item: TokenStream) -> TokenStream {
    extension::extension_impl(attr, item)
}
