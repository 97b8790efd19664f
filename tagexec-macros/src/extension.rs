//! The `#[extension]` attribute macro.
//!
//! Reads which phase methods an `impl` block defines and emits the matching
//! `ExtensionMeta` and `Extension<Ctx>` implementations.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{ToTokens, quote};
use syn::{
    FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitInt, LitStr, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Phase method names and the `Phase` / `PhaseSet` items they map to.
const PHASES: [(&str, &str, &str); 5] = [
    ("preread", "Preread", "PREREAD"),
    ("access", "Access", "ACCESS"),
    ("header_filter", "HeaderFilter", "HEADER_FILTER"),
    ("body_filter", "BodyFilter", "BODY_FILTER"),
    ("log", "Log", "LOG"),
];

/// Arguments for the `#[extension]` macro.
pub(crate) struct ExtensionArgs {
    pub name: Option<LitStr>,
    pub priority: i32,
    pub context: Option<Type>,
}

impl Parse for ExtensionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut priority = 0;
        let mut context = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    name = Some(input.parse()?);
                }
                "priority" => {
                    let negative = input.parse::<Option<Token![-]>>()?.is_some();
                    let lit: LitInt = input.parse()?;
                    let value: i64 = lit.base10_parse()?;
                    let value = if negative { -value } else { value };
                    priority = i32::try_from(value).map_err(|_| {
                        syn::Error::new(lit.span(), "priority must fit in an i32")
                    })?;
                }
                "context" => {
                    context = Some(input.parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ExtensionArgs {
            name,
            priority,
            context,
        })
    }
}

/// A phase method found in the impl block.
struct PhaseMethod {
    method: Ident,
    variant: Ident,
    flag: Ident,
}

/// The `Ctx` of a `ctx: &mut Ctx` argument.
fn context_type(method: &ImplItemFn) -> syn::Result<Type> {
    let inputs = &method.sig.inputs;
    let receiver = match inputs.first() {
        Some(FnArg::Receiver(receiver)) if inputs.len() == 3 => receiver,
        _ => {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "phase method must have the shape `async fn(&self, ctx: &mut Ctx, config: &Value)`",
            ));
        }
    };
    if receiver.reference.is_none() || receiver.mutability.is_some() {
        return Err(syn::Error::new_spanned(
            receiver,
            "phase method must take `&self`",
        ));
    }

    match &inputs[1] {
        FnArg::Typed(pat_type) => match &*pat_type.ty {
            Type::Reference(reference) if reference.mutability.is_some() => {
                Ok((*reference.elem).clone())
            }
            other => Err(syn::Error::new_spanned(
                other,
                "phase method context argument must be a mutable reference (&mut Ctx)",
            )),
        },
        FnArg::Receiver(receiver) => Err(syn::Error::new_spanned(
            receiver,
            "unexpected receiver in context position",
        )),
    }
}

/// Implementation of the `#[extension]` attribute macro.
pub fn extension_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ExtensionArgs);
    let input = parse_macro_input!(item as ItemImpl);

    match expand(args, &input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: ExtensionArgs, input: &ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[extension] must be placed on an inherent impl block",
        ));
    }

    let Some(name) = args.name else {
        return Err(syn::Error::new(
            Span::call_site(),
            "missing required argument: name = \"...\"",
        ));
    };
    if name.value().trim().is_empty() {
        return Err(syn::Error::new_spanned(&name, "extension name must not be empty"));
    }

    let mut context = args.context;
    let mut methods = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let ident = method.sig.ident.to_string();
        let Some((_, variant, flag)) = PHASES.iter().find(|(m, _, _)| *m == ident) else {
            continue;
        };

        if method.sig.asyncness.is_none() {
            return Err(syn::Error::new_spanned(
                &method.sig.fn_token,
                "phase method must be async",
            ));
        }

        let ctx = context_type(method)?;
        let expected = context.as_ref().map(|known| known.to_token_stream().to_string());
        match expected {
            None => context = Some(ctx),
            Some(known) if known != ctx.to_token_stream().to_string() => {
                return Err(syn::Error::new_spanned(
                    ctx,
                    format!(
                        "all phase methods must share one context type, expected `{}`",
                        known
                    ),
                ));
            }
            Some(_) => {}
        }

        methods.push(PhaseMethod {
            method: method.sig.ident.clone(),
            variant: Ident::new(variant, method.sig.ident.span()),
            flag: Ident::new(flag, method.sig.ident.span()),
        });
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let priority = args.priority;

    let flags = methods.iter().map(|m| {
        let flag = &m.flag;
        quote! { | ::tagexec::PhaseSet::#flag }
    });

    let arms: Vec<_> = methods
        .iter()
        .map(|m| {
            let method = &m.method;
            let variant = &m.variant;
            quote! {
                ::tagexec::Phase::#variant => <#self_ty>::#method(self, __ctx, __config)
                    .await
                    .map_err(::core::convert::Into::into),
            }
        })
        .collect();

    let meta_impl = quote! {
        impl #impl_generics ::tagexec::ExtensionMeta for #self_ty #where_clause {
            fn name(&self) -> &str {
                #name
            }

            fn phases(&self) -> ::tagexec::PhaseSet {
                ::tagexec::PhaseSet::empty() #(#flags)*
            }

            fn priority(&self) -> i32 {
                #priority
            }
        }
    };

    let extension_impl = match context {
        Some(ctx) => {
            let run = run_fn(&ctx.to_token_stream(), &arms);
            quote! {
                impl #impl_generics ::tagexec::Extension<#ctx> for #self_ty #where_clause {
                    #run
                }
            }
        }
        None => {
            // No phase method names the context, so the extension accepts any.
            let mut generics = input.generics.clone();
            generics
                .params
                .push(syn::parse_quote!(__Ctx: ::core::marker::Send));
            let (impl_generics, _, where_clause) = generics.split_for_impl();
            let run = run_fn(&quote!(__Ctx), &arms);
            quote! {
                impl #impl_generics ::tagexec::Extension<__Ctx> for #self_ty #where_clause {
                    #run
                }
            }
        }
    };

    Ok(quote! {
        #input
        #meta_impl
        #extension_impl
    })
}

fn run_fn(
    ctx: &proc_macro2::TokenStream,
    arms: &[proc_macro2::TokenStream],
) -> proc_macro2::TokenStream {
    quote! {
        #[allow(unused_variables)]
        async fn run(
            &self,
            __phase: ::tagexec::Phase,
            __ctx: &mut #ctx,
            __config: &::tagexec::Value,
        ) -> ::core::result::Result<(), ::tagexec::BoxError> {
            #[allow(unreachable_patterns)]
            match __phase {
                #(#arms)*
                _ => ::core::result::Result::Ok(()),
            }
        }
    }
}
