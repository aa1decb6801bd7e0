//! Implementation of the `#[derive(Class)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Member, Type, parse_macro_input, parse_quote};

use crate::attrs::{ClassAttrs, FieldAttrs};

pub fn derive_class_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_class_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// The field holding the parent class.
struct BaseField<'a> {
    member: Member,
    ty: &'a Type,
}

fn derive_class_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let attrs = ClassAttrs::from_attrs(&input.attrs)?;
    let krate = attrs.krate.unwrap_or_else(|| parse_quote!(::classdb::core));
    let class_name = attrs.name.unwrap_or_else(|| name.to_string());

    let base = find_base(input)?;
    let base_member = &base.member;
    let base_ty = base.ty;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::StaticClass for #name #ty_generics #where_clause {
            const CLASS_NAME: &'static str = #class_name;
            const PARENT_CLASS_NAME: &'static str =
                <#base_ty as #krate::StaticClass>::CLASS_NAME;
        }

        impl #impl_generics #krate::Object for #name #ty_generics #where_clause {
            fn class_name(&self) -> &'static str {
                #class_name
            }

            fn cast_ref(
                &self,
                type_id: ::std::any::TypeId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if type_id == ::std::any::TypeId::of::<Self>() {
                    ::std::option::Option::Some(self as &dyn ::std::any::Any)
                } else {
                    #krate::Object::cast_ref(&self.#base_member, type_id)
                }
            }

            fn cast_mut(
                &mut self,
                type_id: ::std::any::TypeId,
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                if type_id == ::std::any::TypeId::of::<Self>() {
                    ::std::option::Option::Some(self as &mut dyn ::std::any::Any)
                } else {
                    #krate::Object::cast_mut(&mut self.#base_member, type_id)
                }
            }

            fn base_object(&self) -> &#krate::BaseObject {
                #krate::Object::base_object(&self.#base_member)
            }

            fn base_object_mut(&mut self) -> &mut #krate::BaseObject {
                #krate::Object::base_object_mut(&mut self.#base_member)
            }
        }
    })
}

/// Locate the field marked `#[class(base)]`, or the only field named `base`.
fn find_base(input: &DeriveInput) -> syn::Result<BaseField<'_>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Class can only be derived for structs",
        ));
    };

    let mut marked = Vec::new();
    let mut named_base = None;
    for (index, field) in data.fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        if FieldAttrs::from_attrs(&field.attrs)?.base {
            marked.push(BaseField {
                member: member.clone(),
                ty: &field.ty,
            });
        }
        if field.ident.as_ref().is_some_and(|ident| ident == "base") {
            named_base = Some(BaseField {
                member,
                ty: &field.ty,
            });
        }
    }

    if marked.len() > 1 {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "only one field can be marked #[class(base)]",
        ));
    }
    if let Some(base) = marked.pop() {
        return Ok(base);
    }
    if let Some(base) = named_base {
        return Ok(base);
    }

    let span = match &data.fields {
        Fields::Unit => input.ident.span(),
        fields => fields.span(),
    };
    Err(syn::Error::new(
        span,
        "Class requires a field embedding the parent class, named `base` or marked #[class(base)]",
    ))
}
