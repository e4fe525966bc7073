use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, Type, Variant};

const CONTEXT_FIELD: &str = "context";
const SOURCE_FIELD: &str = "source";
const INTERNAL_VARIANT: &str = "Internal";

/// Accepted spellings of `Option<Cow<'static, str>>` after whitespace removal.
const CONTEXT_TYPES: &[&str] = &[
    "Option<Cow<'static,str>>",
    "Option<std::borrow::Cow<'static,str>>",
    "Option<::std::borrow::Cow<'static,str>>",
];

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

struct ErrorModel<'a> {
    input: &'a DeriveInput,
    ext: Ident,
    variants: Vec<ErrorVariant<'a>>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    match ErrorModel::parse(&input) {
        Ok(model) => model.render(),
        Err(err) => err.to_compile_error(),
    }
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "weld_error variants need named fields (`message`/`source` and `context`)",
            ));
        };

        let mut has_context = false;
        let mut source = None;
        for field in &fields.named {
            let Some(name) = field.ident.as_ref() else { continue };
            if name == CONTEXT_FIELD {
                if !is_context_type(&field.ty) {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if source.is_none() && is_source_field(name, field) {
                source = Some((name, &field.ty));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "weld_error variants with a source need `context: Option<Cow<'static, str>>`",
            ));
        }

        Ok(Self {
            ident: &variant.ident,
            source,
            has_context,
            cfg: variant.attrs.iter().filter(|attr| attr.path().is_ident("cfg")).collect(),
        })
    }
}

impl<'a> ErrorModel<'a> {
    fn parse(input: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Enum(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "weld_error can only be applied to enums",
            ));
        };

        let variants =
            data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>()?;

        Ok(Self { input, ext: format_ident!("{}Ext", input.ident), variants })
    }

    fn render(&self) -> TokenStream {
        let input = self.input;
        let derives = self.missing_derives();
        let ext_trait = self.ext_trait();
        let accessor = self.context_accessor();
        let source_impls = self.variants.iter().filter_map(|v| self.source_impl(v));
        let internal = self.internal_impls();

        quote! {
            #[allow(non_shorthand_field_patterns)]
            #derives
            #input

            #ext_trait
            #accessor
            #(#source_impls)*
            #internal

            #[allow(dead_code)]
            fn format_context(
                context: &Option<::std::borrow::Cow<'static, str>>,
            ) -> ::std::borrow::Cow<'static, str> {
                match context {
                    Some(c) => ::std::borrow::Cow::Owned(format!(" ({c})")),
                    None => ::std::borrow::Cow::Borrowed(""),
                }
            }
        }
    }

    fn missing_derives(&self) -> TokenStream {
        let present = derived_names(&self.input.attrs);
        let mut wanted = Vec::new();
        if !present.contains("Debug") {
            wanted.push(quote! { Debug });
        }
        if !present.contains("Error") {
            wanted.push(quote! { ::thiserror::Error });
        }
        if wanted.is_empty() { quote! {} } else { quote! { #[derive(#(#wanted),*)] } }
    }

    fn ext_trait(&self) -> TokenStream {
        let name = &self.input.ident;
        let ext = &self.ext;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let ident = v.ident;
            let cfg = &v.cfg;
            quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
        });

        quote! {
            pub trait #ext<T> {
                /// Attaches a description of where the failure happened.
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::std::result::Result<T, #name>;
            }

            #[automatically_derived]
            impl<T> #ext<T> for ::std::result::Result<T, #name> {
                #[inline]
                fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                    self.map_err(|mut err| {
                        #[allow(unreachable_patterns)]
                        match &mut err {
                            #(#arms)*
                            _ => {},
                        }
                        err
                    })
                }
            }
        }
    }

    fn context_accessor(&self) -> TokenStream {
        let name = &self.input.ident;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let ident = v.ident;
            let cfg = &v.cfg;
            quote! { #(#cfg)* Self::#ident { context, .. } => context.as_deref(), }
        });

        quote! {
            #[automatically_derived]
            impl #name {
                /// Context attached to this error, if any.
                #[must_use]
                pub fn context(&self) -> Option<&str> {
                    #[allow(unreachable_patterns)]
                    match self {
                        #(#arms)*
                        _ => None,
                    }
                }
            }
        }
    }

    fn source_impl(&self, variant: &ErrorVariant<'_>) -> Option<TokenStream> {
        if variant.ident == INTERNAL_VARIANT {
            return None;
        }
        let (field, ty) = variant.source?;
        let name = &self.input.ident;
        let ext = &self.ext;
        let ident = variant.ident;
        let cfg = &variant.cfg;

        Some(quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<#ty> for #name {
                #[inline]
                fn from(#field: #ty) -> Self {
                    Self::#ident { #field, context: None }
                }
            }

            #(#cfg)*
            #[automatically_derived]
            impl<T> #ext<T> for ::std::result::Result<T, #ty> {
                #[inline]
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::std::result::Result<T, #name> {
                    self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                }
            }
        })
    }

    fn internal_impls(&self) -> TokenStream {
        let Some(internal) = self.variants.iter().find(|v| v.ident == INTERNAL_VARIANT) else {
            return quote! {};
        };
        let name = &self.input.ident;
        let cfg = &internal.cfg;
        let context = if internal.has_context { quote! { context: None, } } else { quote! {} };

        quote! {
            #(#cfg)*
            #[automatically_derived]
            impl From<&'static str> for #name {
                #[inline]
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Borrowed(message), #context }
                }
            }

            #(#cfg)*
            #[automatically_derived]
            impl From<String> for #name {
                #[inline]
                fn from(message: String) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Owned(message), #context }
                }
            }
        }
    }
}

fn is_source_field(name: &Ident, field: &Field) -> bool {
    name == SOURCE_FIELD
        || field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

fn is_context_type(ty: &Type) -> bool {
    let rendered: String = quote!(#ty).to_string().chars().filter(|c| !c.is_whitespace()).collect();
    CONTEXT_TYPES.contains(&rendered.as_str())
}

fn derived_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                names.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }
    names
}
