// src/lib.rs for `config-from-file-derive` crate

use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, ExprLit, Field, Fields, Ident, Lit, LitStr, Meta,
    Token, Type,
};

// Define the procedural macro for `ConfigFromFile`
#[proc_macro_derive(ConfigFromFile, attributes(configfile))]
pub fn config_from_file_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    impl_config_from_file(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct StructAttrs {
    loader: Option<syn::Path>,
    default: Option<LitStr>,
    default_fn: Option<syn::Path>,
    env_prefix: Option<LitStr>,
}

impl StructAttrs {
    fn parse(ast: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in ast.attrs.iter().filter(|a| a.path().is_ident("configfile")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("loader") {
                    attrs.loader = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("default") {
                    attrs.default = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("default_fn") {
                    attrs.default_fn = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("env_prefix") {
                    attrs.env_prefix = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unsupported configfile attribute"));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }

    fn has_default(&self) -> bool {
        self.default.is_some() || self.default_fn.is_some() || self.env_prefix.is_some()
    }

    // Only a lone `default = "..."` stays a static value; anything else is a factory.
    fn has_factory(&self) -> bool {
        self.default_fn.is_some() || self.env_prefix.is_some()
    }
}

enum Holder<'a> {
    Configfile {
        ident: &'a Ident,
        init_arg: String,
        serde_name: String,
    },
    Parent { ident: &'a Ident, ty: &'a Type },
}

fn find_holder<'a>(ast: &'a DeriveInput) -> syn::Result<Holder<'a>> {
    let struct_name = &ast.ident; // Capture the struct's name.

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "ConfigFromFile only supports structs with named fields.",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "ConfigFromFile can only be derived for structs.",
            ))
        }
    };

    let mut by_name = None;
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("configfile")) {
            let serde_name = serde_key(field, ident)?;
            if let Meta::Path(_) = &attr.meta {
                return Ok(Holder::Configfile {
                    ident,
                    init_arg: serde_name.clone(),
                    serde_name,
                });
            }

            let mut init_arg = None;
            let mut parent = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("init_arg") {
                    init_arg = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("parent") {
                    parent = true;
                } else {
                    return Err(meta.error("unsupported configfile field attribute"));
                }
                Ok(())
            })?;

            if parent {
                return Ok(Holder::Parent {
                    ident,
                    ty: &field.ty,
                });
            }
            return Ok(Holder::Configfile {
                ident,
                init_arg: init_arg.unwrap_or_else(|| serde_name.clone()),
                serde_name,
            });
        }

        if ident == "configfile" {
            by_name = Some((ident, serde_key(field, ident)?));
        }
    }

    by_name
        .map(|(ident, serde_name)| Holder::Configfile {
            ident,
            init_arg: serde_name.clone(),
            serde_name,
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                struct_name,
                "ConfigFromFile needs a `configfile: Option<PathBuf>` field or a field marked #[configfile] / #[configfile(parent)].",
            )
        })
}

/// Key serde deserializes `field` from: `#[serde(rename = "..")]`,
/// `#[serde(rename(deserialize = ".."))]`, or the field name.
fn serde_key(field: &Field, ident: &Ident) -> syn::Result<String> {
    let mut name = ident.to_string();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas.iter().filter(|m| m.path().is_ident("rename")) {
            match meta {
                Meta::NameValue(nv) => {
                    if let Some(lit) = str_lit(&nv.value) {
                        name = lit;
                    }
                }
                Meta::List(list) => {
                    let nested =
                        list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                    for inner in &nested {
                        if let Meta::NameValue(nv) = inner {
                            if nv.path.is_ident("deserialize") {
                                if let Some(lit) = str_lit(&nv.value) {
                                    name = lit;
                                }
                            }
                        }
                    }
                }
                Meta::Path(_) => {}
            }
        }
    }
    Ok(name)
}

fn str_lit(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Some(lit.value()),
        _ => None,
    }
}

fn impl_config_from_file(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let attrs = StructAttrs::parse(ast)?;
    let holder = find_holder(ast)?;

    let krate = quote!(::config_from_file);
    let trait_path = quote!(#krate::ConfigFromFile);

    let loader_body = match (&attrs.loader, &holder) {
        (Some(loader), _) => quote! {
            #loader(path).map_err(::std::convert::Into::into)
        },
        (None, Holder::Parent { ty, .. }) => quote! {
            <#ty as #trait_path>::get_config_from_file(path).map_err(::std::convert::Into::into)
        },
        (None, Holder::Configfile { .. }) => quote! {
            #krate::loader::load_by_extension(path)
        },
    };

    let accessor = match &holder {
        Holder::Configfile { ident, .. } => quote! {
            ::std::option::Option::as_deref(&self.#ident)
        },
        Holder::Parent { ident, .. } => quote! {
            #trait_path::configfile(&self.#ident)
        },
    };

    // The resolved configfile is recorded under the init arg; hand it to serde
    // under the field's own name.
    let rekey = match &holder {
        Holder::Configfile {
            init_arg,
            serde_name,
            ..
        } if init_arg != serde_name => quote! {
            if let ::std::option::Option::Some(value) = options.remove(#init_arg) {
                options.insert(::std::string::String::from(#serde_name), value);
            }
        },
        _ => quote!(),
    };

    let default_configfile = if attrs.has_factory() {
        let mut chain = quote!(::std::option::Option::<::std::path::PathBuf>::None);
        if let Some(prefix) = &attrs.env_prefix {
            chain = quote!(#chain.or_else(|| #krate::env::configfile_from_env(#prefix)));
        }
        if let Some(default_fn) = &attrs.default_fn {
            chain = quote!(#chain.or_else(#default_fn));
        }
        if let Some(default) = &attrs.default {
            chain = quote!(#chain.or_else(|| ::std::option::Option::Some(::std::path::PathBuf::from(#default))));
        }
        quote! {
            fn default_configfile() -> ::std::option::Option<::std::path::PathBuf> {
                #chain
            }
        }
    } else if let (false, Holder::Parent { ty, .. }) = (attrs.has_default(), &holder) {
        quote! {
            fn default_configfile() -> ::std::option::Option<::std::path::PathBuf> {
                <#ty as #trait_path>::default_configfile()
            }
        }
    } else {
        quote!()
    };

    let configfile_override = match &holder {
        Holder::Parent { ty, .. } => quote! {
            fn configfile_override() -> ::std::option::Option<::std::path::PathBuf> {
                <#ty as #trait_path>::configfile_override()
            }
        },
        Holder::Configfile { .. } => quote!(),
    };

    let field_decl = match (&holder, attrs.has_default()) {
        (Holder::Parent { ty, .. }, false) => quote! {
            <#ty as #trait_path>::configfile_field()
        },
        (Holder::Parent { ty, .. }, true) => {
            let base = quote!(<#ty as #trait_path>::configfile_field());
            with_default(base, &attrs, &trait_path)
        }
        (Holder::Configfile { init_arg, .. }, _) => {
            let base = quote!(#krate::ConfigfileField::new().init_arg(#init_arg));
            with_default(base, &attrs, &trait_path)
        }
    };

    Ok(quote! {
        impl #impl_generics #trait_path for #struct_name #ty_generics #where_clause {
            type Error = #krate::Error;

            fn get_config_from_file(
                path: &::std::path::Path,
            ) -> ::std::result::Result<#krate::__private::serde_json::Value, Self::Error> {
                #loader_body
            }

            #[allow(unused_mut)]
            fn from_options(mut options: #krate::Options) -> ::std::result::Result<Self, Self::Error> {
                #rekey
                #krate::options::deserialize_options(options)
            }

            fn configfile(&self) -> ::std::option::Option<&::std::path::Path> {
                #accessor
            }

            #default_configfile

            #configfile_override

            fn configfile_field() -> #krate::ConfigfileField {
                #field_decl
            }
        }
    })
}

fn with_default(
    base: proc_macro2::TokenStream,
    attrs: &StructAttrs,
    trait_path: &proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
    match (&attrs.default, attrs.has_factory()) {
        (Some(default), false) => quote!(#base.default_value(#default)),
        _ => quote!(#base.default_fn(<Self as #trait_path>::default_configfile)),
    }
}
